//! Solidity interfaces queried by `RpcStateReader`.

use alloy_sol_types::sol;

sol! {
    struct BidClaim {
        address bidder;
        address referrer;
        uint256 paid;
        uint256 payout;
        uint256 refund;
    }

    struct PartialFill {
        uint64 bidId;
        uint96 refund;
        uint256 payout;
    }

    interface IAuctionHouse {
        function lotData(uint96 lotId) external view returns (
            uint48 start,
            uint48 conclusion,
            uint8 quoteTokenDecimals,
            uint8 baseTokenDecimals,
            bool capacityInQuote,
            uint256 capacity,
            uint256 sold,
            uint256 purchased
        );

        function lotRouting(uint96 lotId) external view returns (
            address seller,
            address baseToken,
            address quoteToken,
            bytes7 auctionReference,
            uint256 funding,
            address callbacks,
            bytes7 derivativeReference,
            bool wrapDerivative,
            bytes derivativeParams
        );

        function lotFees(uint96 lotId) external view returns (
            address curator,
            bool curated,
            uint48 curatorFee,
            uint48 protocolFee,
            uint48 referrerFee
        );

        function getModuleForKeycode(bytes5 keycode) external view returns (address module);

        function getModuleForId(uint96 lotId) external view returns (address module);
    }

    interface IAuctionModule {
        function PARENT() external view returns (address parent);

        function getBidClaim(uint96 lotId, uint64 bidId) external view returns (BidClaim memory claim);

        function getPartialFill(uint96 lotId) external view returns (bool hasPartialFill, PartialFill memory partialFill);
    }

    interface IEncryptedMarginalPrice {
        function auctionData(uint96 lotId) external view returns (
            uint64 nextBidId,
            uint64 nextDecryptIndex,
            uint8 status,
            uint64 marginalBidId,
            bool proceedsClaimed,
            uint256 marginalPrice,
            uint256 minPrice,
            uint256 minFilled,
            uint256 minBidSize
        );

        function bids(uint96 lotId, uint64 bidId) external view returns (
            address bidder,
            uint96 amount,
            uint96 minAmountOut,
            address referrer,
            uint8 status
        );
    }

    interface IFixedPriceBatch {
        function auctionData(uint96 lotId) external view returns (
            uint256 price,
            uint8 status,
            uint64 nextBidId,
            bool settlementCleared,
            uint256 totalBidAmount,
            uint256 minFilled
        );

        function bids(uint96 lotId, uint64 bidId) external view returns (
            address bidder,
            uint96 amount,
            address referrer,
            uint8 status
        );
    }

    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }

    interface ILinearVesting {
        function computeId(address underlyingToken, bytes params) external pure returns (uint256 tokenId);
        function balanceOf(address owner, uint256 tokenId) external view returns (uint256 balance);
    }
}
